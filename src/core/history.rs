use crate::core::{Commit, ObjectId, Repository, Result};

/// Walks parent links from a starting commit, newest first.
///
/// The walk is lazy and one-shot. It ends at a root commit, after `limit`
/// commits, or right after yielding an error.
pub struct History<'a> {
    repo: &'a Repository,
    next: Option<ObjectId>,
    remaining: Option<usize>,
}

impl<'a> History<'a> {
    pub fn new(repo: &'a Repository, start: Option<ObjectId>, limit: Option<usize>) -> Self {
        Self {
            repo,
            next: start,
            remaining: limit,
        }
    }
}

impl Iterator for History<'_> {
    type Item = Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        let id = self.next.take()?;

        match Commit::load(self.repo, &id) {
            Ok(commit) => {
                self.next = commit.parent;
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                Some(Ok((id, commit)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

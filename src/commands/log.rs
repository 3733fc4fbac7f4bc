use crate::core::{Commit, ObjectId, Repository};
use colored::*;

pub fn run(repo: &Repository, limit: Option<usize>, oneline: bool) -> anyhow::Result<()> {
    let mut shown = 0;

    for (i, entry) in repo.log(limit)?.enumerate() {
        let (id, commit) = entry?;
        if oneline {
            print_oneline_commit(&id, &commit, i == 0);
        } else {
            print_full_commit(&id, &commit);
        }
        shown += 1;
    }

    if shown == 0 {
        println!("{}", "No commits found".yellow());
    }
    Ok(())
}

fn print_oneline_commit(id: &ObjectId, commit: &Commit, is_head: bool) {
    let prefix = if is_head { "* " } else { "  " };
    let hash = if is_head {
        id.short().bright_yellow()
    } else {
        id.short().yellow()
    };
    println!("{}{} {}", prefix, hash, commit.short_message());
}

fn print_full_commit(id: &ObjectId, commit: &Commit) {
    println!("{} {}", "commit".yellow(), id.to_string().yellow());
    if let Some(parent) = &commit.parent {
        println!("Parent: {}", parent.short().bright_blue());
    }
    println!("Author: {}", commit.author.bright_white());
    println!("Date:   {}", commit.timestamp.format("%a %b %d %H:%M:%S %Y %z"));
    println!();
    for line in commit.message.lines() {
        println!("    {}", line);
    }
    println!();
}

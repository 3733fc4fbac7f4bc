pub mod add;
pub mod branch;
pub mod cat_file;
pub mod commit;
pub mod config;
pub mod fsck;
pub mod hash_object;
pub mod init;
pub mod log;
pub mod ls_tree;

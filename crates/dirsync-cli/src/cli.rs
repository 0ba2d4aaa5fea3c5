//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;
use dirsync_core::SyncPolicy;

/// Compare two directory trees and optionally synchronize them
///
/// Without any sync flag only the differences are reported. LEFT is the
/// source and RIGHT the destination unless --reverse is given.
///
/// Examples:
///   dirsync photos backup               # report differences
///   dirsync photos backup -m -n         # preview a mirror
///   dirsync photos backup -a -o -t      # copy and update, trashing old versions
#[derive(Parser, Debug)]
#[command(name = "dirsync")]
#[command(author, version, verbatim_doc_comment)]
pub struct Cli {
    /// Left directory
    pub left: PathBuf,

    /// Right directory
    pub right: PathBuf,

    /// Copy items absent in the destination
    #[arg(short, long)]
    pub add_missing: bool,

    /// Remove destination items absent in the source
    #[arg(short, long)]
    pub remove_extra: bool,

    /// Overwrite files whose content differs
    #[arg(short, long)]
    pub overwrite_content: bool,

    /// Shorthand for --add-missing --remove-extra --overwrite-content
    #[arg(short, long)]
    pub mirror: bool,

    /// Treat RIGHT as the source and LEFT as the destination
    #[arg(long)]
    pub reverse: bool,

    /// Send deleted and overwritten items to the trash
    #[arg(short = 't', long)]
    pub use_trash: bool,

    /// Reuse a cached comparison when available
    #[arg(short = 'c', long)]
    pub use_cache: bool,

    /// The newer file wins when content differs
    #[arg(short = 'l', long)]
    pub preserve_latest: bool,

    /// Only report what would be done
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Do not render progress bars
    #[arg(long)]
    pub hide_progress_bar: bool,

    /// Print the comparison and sync report as JSON
    #[arg(long)]
    pub json: bool,

    /// Settings file (toml, json or yaml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for cached comparisons
    #[arg(long, value_name = "PATH", env = "DIRSYNC_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Use a directory instead of the system trash
    #[arg(long, value_name = "PATH", env = "DIRSYNC_TRASH_DIR")]
    pub trash_dir: Option<PathBuf>,

    /// Give up after this many seconds; finished items are kept
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn policy(&self) -> SyncPolicy {
        SyncPolicy {
            overwrite: self.overwrite_content || self.mirror,
            add_missing: self.add_missing || self.mirror,
            remove_extra: self.remove_extra || self.mirror,
            reverse_direction: self.reverse,
            dry_run: self.dry_run,
            use_trash: self.use_trash,
            preserve_latest: self.preserve_latest,
        }
    }
}

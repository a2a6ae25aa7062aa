//! lipomerge: merge two single-architecture directory trees into one
//! universal-binary tree.

use anyhow::Result;

fn main() -> Result<()> {
    lipomerge::cli::run()
}

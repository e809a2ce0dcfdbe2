/// Field dictionary listing command.
pub mod dict;
/// Archive load summary command.
pub mod info;
/// Multi-block mesh generation command.
pub mod mbmesh;
/// Per-state listing command.
pub mod states;

mod util;

#[cfg(test)]
mod test_support;

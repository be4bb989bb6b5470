mod cli;
mod util;

pub(crate) use cli::{as_cli, shellexpand};

#[cfg(test)]
mod util_tests;

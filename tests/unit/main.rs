//! Unit tests mirroring the `src/` tree, one test file per source file

mod convert;

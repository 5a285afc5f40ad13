pub mod compiling;

pub mod ini_writer;

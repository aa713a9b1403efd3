pub mod testfs;

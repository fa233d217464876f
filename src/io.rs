//! Reading and writing event and histogram tables

pub mod hdf5;

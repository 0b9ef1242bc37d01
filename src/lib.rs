pub mod driver;
pub mod vm_config;

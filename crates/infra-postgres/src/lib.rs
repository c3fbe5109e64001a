// PostgreSQL implementation of the ProbeDriver port

mod driver;

pub use driver::PgProbeDriver;

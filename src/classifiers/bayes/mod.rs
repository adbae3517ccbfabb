pub mod partitioned;

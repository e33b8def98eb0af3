pub mod criteria;
pub mod link;
pub mod row;

pub mod buyers;
pub mod shops;

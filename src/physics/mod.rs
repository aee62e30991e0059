pub mod cone;
pub mod los;
pub mod viewshed;

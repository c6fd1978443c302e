pub mod feedback;
pub mod filter_bar;
pub mod record_modal;
pub mod table;
pub mod table_block;
pub mod template;

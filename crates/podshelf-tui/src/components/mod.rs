pub mod favorites_panel;
pub mod header;
pub mod help_overlay;
pub mod player_bar;
pub mod show_detail;
pub mod show_grid;

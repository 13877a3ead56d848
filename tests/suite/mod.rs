mod app_flow;
mod config_flow;
mod render;

use crate::core::config::data::{path_display, Config};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        println!("  server-url: {}", self.server_url());
        match &self.data_dir {
            Some(dir) => println!("  data-dir: {}", path_display(dir)),
            None => println!("  data-dir: (platform default)"),
        }
        match self.syntax_enabled() {
            true => println!("  syntax: on"),
            false => println!("  syntax: off"),
        }
        match &self.welcome_message {
            Some(message) => println!("  welcome-message: {message}"),
            None => println!("  welcome-message: (default)"),
        }
    }
}

use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    chooto::cli::main()
}

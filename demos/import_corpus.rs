use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    pixcorpus::example_apps::run_import_demo(std::env::args().skip(1))
}

fn main() {
    if let Err(err) = valentine_bouquet::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn main() {
    if let Err(err) = family_tree_layout::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

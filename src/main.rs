fn main() {
    if let Err(err) = tez_dag_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn main() {
    kvcheck::cli::run();
}

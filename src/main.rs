fn main() {
    jftt::cli::run();
}

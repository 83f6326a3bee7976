fn main() {
    match ccaudit::cli::run() {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            ccaudit::ui::eprintln_error(&err);
            std::process::exit(ccaudit::exit::exit_code(&err));
        }
    }
}

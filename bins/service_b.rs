//! Service B: book and author API.

fn main() -> std::process::ExitCode {
    library_admin::launch("service_b", server::run)
}

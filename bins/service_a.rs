//! Service A: flower API and the admin panel under `/service-a/admin`.

fn main() -> std::process::ExitCode {
    library_admin::launch("service_a", panel::run)
}

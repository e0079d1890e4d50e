#[tokio::main]
async fn main() {
    if let Err(e) = hospital_admin_lib::run().await {
        eprintln!("hospital-admin: {e}");
        std::process::exit(1);
    }
}

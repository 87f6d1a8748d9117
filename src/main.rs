use elementwise_bench::driver::{self, HarnessConfig};

fn main() {
    env_logger::init();
    let config = HarnessConfig::default();
    if let Err(err) = driver::run(&config) {
        eprintln!("benchmark failed: {err} (code {})", err.code());
        std::process::exit(1);
    }
}

use miniultimax_core::config::Config;
use miniultimax_core::proxy::{Target, TimeoutClass, ROUTES};

pub fn run(config: &Config) {
    println!("{:<6} {:<30} {:<28} {:>8}", "METHOD", "PATH", "TARGET", "TIMEOUT");
    println!("{}", "-".repeat(75));

    println!("{:<6} {:<30} {:<28} {:>8}", "GET", "/health", "(local)", "-");
    for route in ROUTES {
        let (target, timeout) = match route.target {
            Target::Upstream(path) => {
                let secs = match route.group.timeout_class() {
                    TimeoutClass::Standard => config.timeouts.standard,
                    TimeoutClass::Batch => config.timeouts.batch,
                };
                (path.to_string(), format!("{}s", secs))
            }
            Target::Echo(_) => ("(local echo)".to_string(), "-".to_string()),
        };
        println!("{:<6} {:<30} {:<28} {:>8}", route.method.as_str(), route.path, target, timeout);
    }

    println!();
    println!("Upstream base URL: {}", config.upstream.base_url);
}

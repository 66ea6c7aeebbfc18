use vsphere_ci_session_metrics::cli;

pub fn main() -> anyhow::Result<()> {
    cli::process_command()
}

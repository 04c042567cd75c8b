// ==========================================
// 整车厂运营台账 - 命令行主入口
// ==========================================

use carmaker_ledger::cli::{self, Cli};
use carmaker_ledger::logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_with_filter(cli.log.as_deref(), cli.log_json);

    tracing::debug!(
        version = carmaker_ledger::VERSION,
        command = ?cli.command,
        "{}",
        carmaker_ledger::APP_NAME
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run(cli, &mut out)
}

use anyhow::Context;
use mdesk::kernel::config::load_config;
use mdesk_server::App;

fn main() -> anyhow::Result<()> {
    let runtime = mdesk_runtime::build_service_runtime()?;

    runtime.block_on(async {
        let cfg = load_config(Some("server")).context("Critical: Configuration is malformed")?;

        App::builder().config(cfg).build().await?.run().await
    })
}

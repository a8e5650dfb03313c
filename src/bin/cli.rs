use anyhow::{bail, Context};
use kandy_client::{
    amount::{DisplayAmount, ETHER_DECIMALS},
    bond::{self, BondDescriptor},
    config::{setup_logger, Command, ConfigCli},
    dashboard::Dashboard,
    network::Network,
    notify,
    primitives::Address,
    provider::{JsonRpcProvider, Signer},
    rebase_timer::{format_timestamp, rebase_timer_view},
    store::Store,
    token,
    wrap::TxOutcome,
};
use std::time::Duration;
use structopt::StructOpt;

#[macro_use]
extern crate log;

#[tokio::main]
async fn main() {
    let conf = ConfigCli::from_args();
    setup_logger(conf.trace, conf.debug, conf.no_log_timestamp);

    if conf.print_config {
        info!("{:?}", conf);
    }

    if let Err(e) = run(conf).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(conf: ConfigCli) -> anyhow::Result<()> {
    let address_book = conf.address_book().context("Could not load the address book")?;
    let provider = JsonRpcProvider::new(
        conf.rpc_url.clone(),
        conf.account,
        Duration::from_secs(conf.rpc_timeout),
    )?
    .with_poll_interval(Duration::from_millis(conf.poll_interval));

    let (notifier, mut notices) = notify::channel();
    let printer = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            println!("{}", notice);
        }
    });

    let dashboard = Dashboard::new(Store::default(), notifier, address_book, conf.refresh_policy());

    let result = execute(conf.command, &dashboard, &provider, conf.network).await;

    // Closing the notifier ends the printer once every notice is out.
    drop(dashboard);
    printer.await?;
    result
}

async fn execute(
    command: Command,
    dashboard: &Dashboard,
    provider: &JsonRpcProvider,
    network: Network,
) -> anyhow::Result<()> {
    match command {
        Command::Balances => {
            let address = account(provider).await?;
            let balances = dashboard.get_balances(&address, network, provider).await?.balances;
            println!("KANDY:   {}", balances.kandy);
            println!("sKANDY:  {}", balances.skandy);
            println!("wsKANDY: {}", balances.wskandy);
        }
        Command::Account => {
            let address = account(provider).await?;
            let details = dashboard.load_account_details(&address, network, provider).await?;
            println!("KANDY:   {}", details.balances.kandy);
            println!("sKANDY:  {}", details.balances.skandy);
            println!("wsKANDY: {}", details.balances.wskandy);
            println!("Stake allowance (KANDY):   {}", details.staking.kandy);
            println!("Unstake allowance (sKANDY): {}", details.staking.skandy);
            println!("Wrap allowance (sKANDY):    {}", details.wrapping.skandy);
        }
        Command::Bonds => {
            for bond in bond::list_bonds() {
                match bond::address_for_network(bond, network) {
                    Some(address) => println!("{:<14} {:<14} {}", bond.name, bond.display_name, address),
                    None => println!("{:<14} {:<14} not offered on {}", bond.name, bond.display_name, network),
                }
                if let Some(strategy) = bond.tokens_in_strategy() {
                    let strategy = DisplayAmount::from_raw(&strategy, ETHER_DECIMALS);
                    println!("{:<14} tokens in strategy: {}", "", strategy);
                }
            }
        }
        Command::Bond {
            name,
        } => {
            let bond = find_bond(&name)?;
            let address = account(provider).await?;
            let details =
                dashboard.calculate_user_bond_details(Some(&address), bond, network, provider).await?;
            println!("{} ({})", details.display_name, if details.is_lp { "LP" } else { "reserve" });
            println!("Allowance:        {}", details.allowance);
            println!("Balance:          {}", details.balance);
            println!("Native balance:   {}", details.native_balance);
            println!("Interest due:     {}", details.interest_due);
            println!("Pending payout:   {}", details.pending_payout);
            println!("Maturation block: {}", details.maturation_block);
        }
        Command::Token {
            name,
        } => {
            let token = match token::find_token(&name) {
                Some(token) => token,
                None => bail!("Unknown token '{}'", name),
            };
            let address = account(provider).await?;
            let details =
                dashboard.calculate_user_token_details(Some(&address), token, network, provider).await?;
            println!("{} balance:   {}", details.token, details.balance);
            if !details.is_native {
                println!("{} allowance: {}", details.token, details.allowance);
            }
        }
        Command::Rebase => {
            dashboard.load_app_details(network, provider).await?;
            let app = dashboard.store().state().app;
            println!("{}", rebase_timer_view(&app));
            if let Some(next) = app.next_rebase.and_then(format_timestamp) {
                println!("Next rebase at {}", next);
            }
            if let Some(price) = app.market_price {
                println!("Market price (raw reserve ratio): {}", price);
            }
        }
        Command::WrapPreview {
            unwrap,
            value,
        } => {
            let preview = dashboard
                .calc_wrap_details(Some(provider), !unwrap, value.as_deref(), network)
                .await?;
            match preview {
                Some(amount) => println!("{} {}", amount, if unwrap { "sKANDY" } else { "wsKANDY" }),
                None => println!("Enter an amount to preview"),
            }
        }
        Command::ApproveWrap => {
            let address = account(provider).await?;
            report(dashboard.change_approval(Some(provider), &address, network).await?)?;
        }
        Command::Wrap {
            value,
        } => {
            let address = account(provider).await?;
            report(dashboard.change_wrap(Some(provider), true, &value, &address, network).await?)?;
        }
        Command::Unwrap {
            value,
        } => {
            let address = account(provider).await?;
            report(dashboard.change_wrap(Some(provider), false, &value, &address, network).await?)?;
        }
    }

    Ok(())
}

/// The configured account, or the first account the endpoint exposes.
async fn account(provider: &JsonRpcProvider) -> anyhow::Result<Address> {
    provider.signer_address().await.context("No account to inspect")
}

fn find_bond(name: &str) -> anyhow::Result<&'static BondDescriptor> {
    match bond::find_bond(name) {
        Some(bond) => Ok(bond),
        None => bail!("Unknown bond '{}'", name),
    }
}

fn report(outcome: TxOutcome) -> anyhow::Result<()> {
    match outcome {
        TxOutcome::Confirmed(hash) => {
            info!("Transaction {} confirmed", hash);
            Ok(())
        }
        TxOutcome::Failed(text) => bail!("Transaction failed: {}", text),
        TxOutcome::WalletNotConnected => bail!("No wallet connected"),
    }
}


// crates/rhem-cli/src/commands/trade.rs
//
// `rhem trade {buy, sell, history, set-settlement}`: trade execution.
// Approve the trading engine for the amount first; 1% goes to the fee wallet.

use clap::Subcommand;
use serde_json::json;
use tabled::Tabled;

use rhem_core::Address;
use rhem_economics::Rhem;

use super::{parse_rhem, units, Context};
use crate::output::{format_json, format_table, print_fields, rhem, text, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum TradeCmd {
    /// Execute a buy.
    Buy {
        #[arg(long)]
        caller: Address,
        #[arg(long, value_parser = parse_rhem)]
        amount: Rhem,
        /// Quote price in RHEM, recorded with the trade.
        #[arg(long, value_parser = parse_rhem)]
        price: Rhem,
    },
    /// Execute a sell.
    Sell {
        #[arg(long)]
        caller: Address,
        #[arg(long, value_parser = parse_rhem)]
        amount: Rhem,
        #[arg(long, value_parser = parse_rhem)]
        price: Rhem,
    },
    /// An account's executed trades.
    History { account: Address },
    /// Route one side's net proceeds to an account (Owner role).
    SetSettlement {
        #[arg(long)]
        caller: Address,
        /// "buy" or "sell".
        #[arg(long)]
        side: String,
        #[arg(long)]
        account: Address,
    },
}

#[derive(Tabled)]
struct TradeRow {
    #[tabled(rename = "Time")]
    timestamp: String,
    #[tabled(rename = "Side")]
    side: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Fee")]
    fee: String,
}

pub async fn run(ctx: &Context, cmd: &TradeCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        TradeCmd::Buy {
            caller,
            amount,
            price,
        } => execute(ctx, caller, amount, price, true).await,
        TradeCmd::Sell {
            caller,
            amount,
            price,
        } => execute(ctx, caller, amount, price, false).await,
        TradeCmd::History { account } => {
            let r = ctx.call("trading/history", json!({ "account": account })).await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&r)),
                OutputFormat::Table => {
                    let rows: Vec<TradeRow> = r["trades"]
                        .as_array()
                        .map(Vec::as_slice)
                        .unwrap_or(&[])
                        .iter()
                        .map(|t| TradeRow {
                            timestamp: text(&t["timestamp"]),
                            side: text(&t["side"]),
                            amount: rhem(&t["amount"]),
                            price: rhem(&t["price"]),
                            fee: rhem(&t["fee"]),
                        })
                        .collect();
                    if rows.is_empty() {
                        println!("No trades for {}", account);
                    } else {
                        println!("{}", format_table(&rows));
                    }
                }
            }
            Ok(())
        }
        TradeCmd::SetSettlement {
            caller,
            side,
            account,
        } => {
            let is_buy = match side.as_str() {
                "buy" => true,
                "sell" => false,
                other => return Err(format!("unknown side {:?}, expected buy or sell", other).into()),
            };
            let r = ctx
                .call(
                    "trading/set_settlement",
                    json!({ "caller": caller, "is_buy": is_buy, "account": account }),
                )
                .await?;
            print_fields(
                ctx.format,
                &r,
                &[("Side", text(&r["side"])), ("Settlement", text(&r["account"]))],
            );
            Ok(())
        }
    }
}

async fn execute(
    ctx: &Context,
    caller: &Address,
    amount: &Rhem,
    price: &Rhem,
    is_buy: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let r = ctx
        .call(
            "trading/execute",
            json!({
                "caller": caller,
                "amount": units(amount),
                "price": units(price),
                "is_buy": is_buy,
            }),
        )
        .await?;
    print_fields(
        ctx.format,
        &r,
        &[
            ("Side", text(&r["side"])),
            ("Amount", rhem(&r["amount"])),
            ("Price", rhem(&r["price"])),
            ("Fee", rhem(&r["fee"])),
            ("Time", text(&r["timestamp"])),
        ],
    );
    Ok(())
}

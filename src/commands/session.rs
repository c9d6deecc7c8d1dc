use anyhow::{Context, Result, anyhow};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::flow::{FlowController, RESET_DELAY, Stage};
use crate::ledger::{HistoryFilter, Ledger};
use crate::models::{Platform, StablecoinType};
use crate::provider::DataProvider;

use super::{print_creator, print_preview, print_record};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Platform(Platform),
    Search(String),
    Creators,
    Select(String),
    Amount(String),
    Coin(StablecoinType),
    Review,
    Close,
    Confirm,
    State,
    History,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<SessionCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "platform" => SessionCommand::Platform(arg.parse()?),
        // an empty query lists every creator on the platform
        "search" => SessionCommand::Search(arg.to_string()),
        "creators" => SessionCommand::Creators,
        "select" if !arg.is_empty() => SessionCommand::Select(arg.to_string()),
        "select" => return Err(anyhow!("creatorのidを指定してください: select <id>")),
        "amount" => SessionCommand::Amount(arg.to_string()),
        "coin" => SessionCommand::Coin(arg.parse()?),
        "review" => SessionCommand::Review,
        "close" => SessionCommand::Close,
        "confirm" => SessionCommand::Confirm,
        "state" => SessionCommand::State,
        "history" => SessionCommand::History,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => return Err(anyhow!("不明なコマンドです: {other} (helpで一覧)")),
    };
    Ok(Some(command))
}

pub async fn run(provider: &dyn DataProvider, ledger: &Ledger) -> Result<()> {
    let mut flow = FlowController::from_provider(provider)?;
    print_help();
    print_state(&flow);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("標準入力の読込に失敗しました")?
    {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        if command == SessionCommand::Quit {
            break;
        }
        if let Err(err) = apply(&mut flow, ledger, command) {
            println!("エラー: {err:#}");
        }
    }

    Ok(())
}

fn apply(flow: &mut FlowController, ledger: &Ledger, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Platform(platform) => {
            flow.select_platform(platform);
            print_creators(flow);
        }
        SessionCommand::Search(query) => {
            flow.set_search_query(&query);
            print_creators(flow);
        }
        SessionCommand::Creators => print_creators(flow),
        SessionCommand::Select(id) => {
            let creator = flow.select_creator(&id)?;
            println!("creator選択: {} ({})", creator.name, creator.platform);
        }
        SessionCommand::Amount(text) => {
            flow.set_amount(&text);
            if !flow.can_review() {
                println!("amountを確認できません。creatorを選び、0より大きい数値を入力してください");
            }
        }
        SessionCommand::Coin(kind) => {
            flow.set_stablecoin(kind)?;
            println!("stablecoin選択: {kind}");
        }
        SessionCommand::Review => {
            if !flow.open_preview() {
                println!("まだ確認画面を開けません");
                return Ok(());
            }
            let state = flow.state();
            if let (Some(creator), Some(preview)) = (state.selected_creator, flow.preview()) {
                println!("送金プレビュー: {} ({})", creator.name, creator.platform);
                print_preview(&preview);
                println!("次: confirm");
            }
        }
        SessionCommand::Close => flow.close_preview(),
        SessionCommand::Confirm => {
            let Some(receipt) = flow.confirm_donation()? else {
                println!("確認画面が開いていません。先にreviewしてください");
                return Ok(());
            };
            let creator_name = receipt.creator.name.clone();
            let record = ledger.insert_transaction(&receipt.into_transaction())?;
            println!("送金完了: {creator_name} に送信しました (履歴id={})", record.id);
            println!("{}秒後に最初から始まります", RESET_DELAY.as_secs());
        }
        SessionCommand::State => print_state(flow),
        SessionCommand::History => {
            for row in ledger.filter(&HistoryFilter::default())? {
                print_record(&row);
            }
        }
        SessionCommand::Help => print_help(),
        SessionCommand::Quit => {}
    }
    Ok(())
}

fn print_creators(flow: &FlowController) {
    let creators = flow.filtered_creators();
    if creators.is_empty() {
        println!("一致するcreatorはいません");
    }
    for creator in creators {
        print_creator(creator);
    }
}

fn print_state(flow: &FlowController) {
    let state = flow.state();
    let platform = state
        .selected_platform
        .map_or("-".to_string(), |p| p.to_string());
    let creator = state
        .selected_creator
        .as_ref()
        .map_or("-", |c| c.name.as_str());
    let coin = state
        .selected_stablecoin
        .map_or("-".to_string(), |c| c.to_string());

    println!(
        "stage={} platform={platform} search={:?} creator={creator} amount={:?} coin={coin}",
        flow.stage(),
        state.search_query,
        state.amount_input
    );
    if flow.stage() == Stage::Completed {
        println!("送金完了。まもなくリセットされます");
    }
}

fn print_help() {
    println!("コマンド:");
    println!("  platform <twitch|youtube|kick|rumble>");
    println!("  search <query> / creators / select <id>");
    println!("  amount <number> / coin <usdc|usdt|dai>");
    println!("  review / close / confirm");
    println!("  state / history / help / quit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("platform Twitch").unwrap(),
            Some(SessionCommand::Platform(Platform::Twitch))
        );
        assert_eq!(
            parse_command("search  tech tuber ").unwrap(),
            Some(SessionCommand::Search("tech tuber".to_string()))
        );
        assert_eq!(
            parse_command("amount -5").unwrap(),
            Some(SessionCommand::Amount("-5".to_string()))
        );
        assert_eq!(
            parse_command("coin dai").unwrap(),
            Some(SessionCommand::Coin(StablecoinType::Dai))
        );
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_command("dance").is_err());
        assert!(parse_command("select").is_err());
        assert!(parse_command("platform tiktok").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn scripted_session_records_donation() {
        let mut flow = FlowController::from_provider(&MockProvider).expect("flow");
        let ledger = Ledger::open_in_memory().expect("ledger");

        let script = [
            "platform youtube",
            "search queen",
            "select 4",
            "amount 50",
            "coin usdt",
            "review",
            "confirm",
        ];
        for line in script {
            let command = parse_command(line).expect("parse").expect("command");
            apply(&mut flow, &ledger, command).expect(line);
        }

        assert_eq!(flow.stage(), Stage::Completed);
        let history = ledger.filter(&HistoryFilter::default()).expect("history");
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].creator_name, "ContentQueen");
        assert_eq!(history[0].fee, 1.0);
        assert_eq!(history[0].stablecoin, StablecoinType::Usdt);

        tokio::time::sleep(RESET_DELAY).await;
        tokio::task::yield_now().await;
        assert_eq!(flow.stage(), Stage::SelectingPlatform);
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_without_review_records_nothing() {
        let mut flow = FlowController::from_provider(&MockProvider).expect("flow");
        let ledger = Ledger::open_in_memory().expect("ledger");

        for line in ["platform twitch", "select 1", "amount 0", "review", "confirm"] {
            let command = parse_command(line).expect("parse").expect("command");
            apply(&mut flow, &ledger, command).expect(line);
        }

        assert_eq!(flow.stage(), Stage::EnteringAmount);
        let history = ledger.filter(&HistoryFilter::default()).expect("history");
        assert_eq!(history.len(), 3);
    }
}

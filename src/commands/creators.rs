use anyhow::Result;

use crate::flow::FlowController;
use crate::models::Platform;
use crate::provider::DataProvider;

use super::print_creator;

pub fn run(provider: &dyn DataProvider, platform: Option<Platform>, query: &str) -> Result<()> {
    let mut flow = FlowController::from_provider(provider)?;
    if let Some(platform) = platform {
        flow.select_platform(platform);
    }
    flow.set_search_query(query);

    let creators = flow.filtered_creators();
    if creators.is_empty() {
        println!("一致するcreatorはいません: query={query}");
        return Ok(());
    }

    for creator in creators {
        print_creator(creator);
    }
    Ok(())
}

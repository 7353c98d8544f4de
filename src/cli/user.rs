use tabled::Table;

use crate::{error, spotify::User, types::UserTableRow};

use super::{build_client, spinner};

pub async fn show_user(id: String) {
    let client = match build_client() {
        Ok(c) => c,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    let pb = spinner("Fetching user...");
    let user = User::find(&client, &id).await;
    pb.finish_and_clear();

    let user = match user {
        Ok(u) => u,
        Err(e) => error!("Cannot look up user {}: {}", id, e),
    };

    let row = UserTableRow {
        id: user.id.clone(),
        name: user.display_name.clone().unwrap_or_default(),
        country: user.country.clone().unwrap_or_else(|| "-".to_string()),
        product: user.product.clone().unwrap_or_else(|| "-".to_string()),
        followers: user
            .followers
            .as_ref()
            .map(|f| f.total.to_string())
            .unwrap_or_else(|| "-".to_string()),
    };

    println!("{}", Table::new(vec![row]));
}

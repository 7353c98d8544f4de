use tabled::Table;

use crate::{
    error, info, success,
    types::{Playlist, PlaylistTableRow},
};

use super::{session, spinner};

pub async fn list_playlists() {
    let (client, user) = match session() {
        Ok(s) => s,
        Err(e) => error!("Cannot start session: {}", e),
    };

    let pb = spinner("Fetching playlists...");
    let playlists = user.playlists(&client).await;
    pb.finish_and_clear();

    let playlists = match playlists {
        Ok(p) => p,
        Err(e) => error!("Failed to list playlists for {}: {}", user.id, e),
    };

    if playlists.is_empty() {
        info!("User {} has no playlists", user.id);
        return;
    }

    let mut rows: Vec<PlaylistTableRow> = playlists.iter().map(table_row).collect();
    rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    println!("{}", Table::new(rows));
}

pub async fn create_playlist(name: String, private: bool) {
    let (client, user) = match session() {
        Ok(s) => s,
        Err(e) => error!("Cannot start session: {}", e),
    };

    let pb = spinner("Creating playlist...");
    let result = user
        .create_playlist_with_visibility(&client, &name, !private)
        .await;
    pb.finish_and_clear();

    match result {
        Ok(playlist) => success!(
            "Playlist {} created ({})",
            playlist.name().unwrap_or(&name),
            playlist.id().unwrap_or("no id")
        ),
        Err(e) => error!("Failed to create playlist {}: {}", name, e),
    }
}

fn table_row(playlist: &Playlist) -> PlaylistTableRow {
    PlaylistTableRow {
        name: playlist.name().unwrap_or_default().to_string(),
        visibility: match playlist.public() {
            Some(true) => "public".to_string(),
            Some(false) => "private".to_string(),
            None => "-".to_string(),
        },
        tracks: playlist
            .track_count()
            .map(|count| count.to_string())
            .unwrap_or_else(|| "-".to_string()),
        id: playlist.id().unwrap_or_default().to_string(),
    }
}

//! Favorites and recency store behavior, including persistence.

use std::sync::{Arc, Mutex};

use zaptv::cache::MemoryStore;
use zaptv::catalog::{Channel, FavoritesStore, MediaId, MediaItem, Movie, RecencyStore};

fn channel(stream_id: u64, name: &str) -> MediaItem {
    MediaItem::Channel(Channel {
        num: stream_id as u32,
        name: name.to_string(),
        stream_id,
        stream_icon: String::new(),
        epg_channel_id: name.to_lowercase(),
        category_id: "news".into(),
        tv_archive: false,
    })
}

fn movie(stream_id: u64, name: &str) -> MediaItem {
    MediaItem::Movie(Movie {
        stream_id,
        num: 0,
        name: name.to_string(),
        category_id: "action".into(),
        rating: None,
        duration_secs: None,
        genre: None,
    })
}

#[test]
fn toggle_flips_membership() {
    let favorites = FavoritesStore::new();
    let item = channel(1, "News 24");

    assert!(favorites.toggle(item.clone()));
    assert!(favorites.contains(&MediaId::Channel(1)));
    assert!(!favorites.toggle(item));
    assert!(favorites.is_empty());
}

#[test]
fn identity_keeps_kinds_apart() {
    let favorites = FavoritesStore::new();
    favorites.add(channel(5, "Sport One"));
    favorites.add(movie(5, "Heat"));
    assert_eq!(favorites.len(), 2);

    favorites.remove(&MediaId::Movie(5));
    assert!(favorites.contains(&MediaId::Channel(5)));
    assert!(!favorites.contains(&MediaId::Movie(5)));
}

#[test]
fn favorites_survive_a_restart() {
    let store = Arc::new(MemoryStore::new());
    {
        let favorites = FavoritesStore::new().with_store(store.clone());
        favorites.add(channel(1, "News 24"));
        favorites.add(movie(9, "Heat"));
    }
    let restored = FavoritesStore::new().with_store(store);
    assert_eq!(restored.len(), 2);
    assert!(restored.contains(&MediaId::Channel(1)));
    assert!(restored.contains(&MediaId::Movie(9)));
}

#[test]
fn favorites_notify_listeners_on_change() {
    let favorites = FavoritesStore::new();
    let counts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&counts);
    let id = favorites.subscribe(move |all: &Vec<MediaItem>| {
        sink.lock().unwrap().push(all.len());
    });

    favorites.add(channel(1, "News 24"));
    favorites.remove(&MediaId::Channel(1));
    // Removing something absent changes nothing and stays silent.
    favorites.remove(&MediaId::Channel(1));
    assert_eq!(*counts.lock().unwrap(), vec![1, 0]);

    assert!(favorites.unsubscribe(id));
}

#[test]
fn listeners_may_resubscribe_from_their_own_callback() {
    let favorites = Arc::new(FavoritesStore::new());
    let inner = Arc::clone(&favorites);
    favorites.subscribe(move |_: &Vec<MediaItem>| {
        // A listener reacting to a change by wiring up more listeners
        // must not deadlock the store.
        inner.subscribe(|_: &Vec<MediaItem>| {});
    });

    favorites.add(channel(1, "News 24"));
    assert_eq!(favorites.len(), 1);
}

#[test]
fn recency_is_bounded_and_deduplicated() {
    let recents = RecencyStore::new(3);
    for i in 0..4 {
        recents.record(channel(i, &format!("ch {i}")));
    }

    let items = recents.items();
    assert_eq!(items.len(), 3);
    let ids: Vec<MediaId> = items.iter().map(MediaItem::identity).collect();
    assert_eq!(
        ids,
        vec![MediaId::Channel(3), MediaId::Channel(2), MediaId::Channel(1)]
    );

    // Re-watching an old channel moves it to the front, no duplicate.
    recents.record(channel(2, "ch 2"));
    let ids: Vec<MediaId> = recents.items().iter().map(MediaItem::identity).collect();
    assert_eq!(
        ids,
        vec![MediaId::Channel(2), MediaId::Channel(3), MediaId::Channel(1)]
    );
}

#[test]
fn shrinking_capacity_truncates_immediately() {
    let recents = RecencyStore::new(5);
    for i in 0..5 {
        recents.record(channel(i, &format!("ch {i}")));
    }
    recents.set_capacity(2);
    assert_eq!(recents.len(), 2);
    assert_eq!(recents.capacity(), 2);
    let ids: Vec<MediaId> = recents.items().iter().map(MediaItem::identity).collect();
    assert_eq!(ids, vec![MediaId::Channel(4), MediaId::Channel(3)]);

    // Growing again does not resurrect truncated entries.
    recents.set_capacity(5);
    assert_eq!(recents.len(), 2);
}

#[test]
fn recents_survive_a_restart_and_respect_new_capacity() {
    let store = Arc::new(MemoryStore::new());
    {
        let recents = RecencyStore::new(5).with_store(store.clone());
        for i in 0..5 {
            recents.record(channel(i, &format!("ch {i}")));
        }
    }
    // A smaller capacity at restore time truncates the snapshot.
    let restored = RecencyStore::new(2).with_store(store);
    assert_eq!(restored.len(), 2);
    let ids: Vec<MediaId> = restored.items().iter().map(MediaItem::identity).collect();
    assert_eq!(ids, vec![MediaId::Channel(4), MediaId::Channel(3)]);
}

//! Plain-text views of API payloads.

use std::fmt::Write;

use crate::api::{Listing, Message};

fn listing_block(out: &mut String, base_url: &str, item: &Listing) {
    let _ = writeln!(
        out,
        "#{} {} ({}, {}) by {}",
        item.id,
        item.title,
        item.condition.replace('_', " "),
        item.category,
        item.owner_username
    );
    if !item.description.is_empty() {
        let _ = writeln!(out, "    {}", item.description);
    }
    let _ = writeln!(out, "    Eco Impact: {:.1} kg CO₂ saved", item.eco_impact);
    if let Some(distance) = item.distance {
        let _ = writeln!(out, "    Distance: {distance:.1} km");
    }
    if let Some(coords) = &item.location_coords {
        let _ = writeln!(out, "    Location: {coords}");
    }
    if let Some(image) = &item.image {
        let _ = writeln!(out, "    Image: {base_url}{image}");
    }
}

pub fn render_wardrobe(username: &str, base_url: &str, listings: &[Listing]) -> String {
    let mut out = format!("Your Wardrobe, {username}\nListings: {}\n", listings.len());
    for item in listings {
        listing_block(&mut out, base_url, item);
    }
    out
}

/// `radius_km` is set for a nearby search and shown in the header.
pub fn render_listings(base_url: &str, listings: &[Listing], radius_km: Option<f64>) -> String {
    let scope = match radius_km {
        Some(radius) => format!("within {radius}km"),
        None => "in all areas".to_string(),
    };
    let mut out = format!("Listings ({} {scope})\n", listings.len());
    if listings.is_empty() {
        out.push_str("No listings found.\n");
    }
    for item in listings {
        listing_block(&mut out, base_url, item);
    }
    out
}

pub fn render_inbox(messages: &[Message]) -> String {
    let unread = messages.iter().filter(|message| !message.is_read).count();
    let mut out = format!("Your Inbox ({unread} unread)\n");
    if messages.is_empty() {
        out.push_str("No messages yet.\n");
    }
    for message in messages {
        let marker = if message.is_read { "    " } else { "[new]" };
        let _ = writeln!(
            out,
            "{marker} #{} from {} about \"{}\" ({})",
            message.id, message.sender_username, message.listing.title, message.created_at
        );
        let _ = writeln!(out, "      {}", message.content);
    }
    out
}

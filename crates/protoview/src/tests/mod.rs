mod message;
mod property_edits;

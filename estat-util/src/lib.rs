#![warn(clippy::todo, unused_qualifications)]

pub mod fingerprint;
pub mod io;
pub mod store;

pub fn format_size<T>(value: T) -> humansize::SizeFormatter<T, humansize::FormatSizeOptions>
where
    T: humansize::ToF64 + humansize::Unsigned,
{
    humansize::SizeFormatter::new(value, humansize::BINARY)
}

/// The sort orders supported by the country listing.
///
/// The only order the system offers is "largest estimated GDP first";
/// anything else falls back to store-defined order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    GdpDesc,
}

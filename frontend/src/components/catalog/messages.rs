use common::model::catalog::CardSort;
use common::model::stock::StockUnit;

pub enum Msg {
    Reload,
    UnitsLoaded(Vec<StockUnit>),
    LoadFailed(String),
    SetSort(CardSort),
    SetModelFilter(String),
    /// Index into the visible card list.
    Save(usize),
    Compare(usize),
}

use futures_util::future::join_all;

use crate::bus_contract::{BusError, BusRequest, BusResponse, RequestBus};

/// Issues every request together and waits for all of them.
///
/// Results are positionally matched to `requests`, regardless of the order in
/// which the bus resolves them.
pub async fn join_bus_requests(
    bus: &dyn RequestBus,
    requests: &[BusRequest],
) -> Vec<Result<BusResponse, BusError>> {
    join_all(requests.iter().map(|request| bus.request(request))).await
}

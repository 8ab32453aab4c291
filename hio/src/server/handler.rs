/*
 * SPDX-License-Identifier: Apache-2.0
 */

use async_trait::async_trait;

use super::ServerConnection;

/// Per-connection protocol logic, invoked whenever the dispatch scan finds
/// the connection readable.
///
/// Return true to keep the connection in the set, false to remove and
/// close it.
#[async_trait]
pub trait ConnectionHandler: Send {
    async fn handle(&mut self, conn: &mut ServerConnection) -> bool;
}

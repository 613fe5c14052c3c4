use bytes::Bytes;
use futures::{Stream, StreamExt, future};
use tokio_tungstenite::tungstenite::{self, Message};

use crate::error::FeedResult;

/// Connect to an MSE WebSocket endpoint and return its binary frames.
pub async fn connect(url: &str) -> FeedResult<impl Stream<Item = FeedResult<Bytes>> + use<>> {
    let (ws, _response) = tokio_tungstenite::connect_async(url).await?;
    log::info!("Transport: connected to {}", url);
    Ok(binary_frames(ws))
}

/// Binary messages become frames; the stream ends at the first close.
pub fn binary_frames<St>(messages: St) -> impl Stream<Item = FeedResult<Bytes>>
where
    St: Stream<Item = Result<Message, tungstenite::Error>>,
{
    messages
        .take_while(|msg| future::ready(!matches!(msg, Ok(Message::Close(_)))))
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Binary(data)) => Some(Ok(data)),
                Ok(Message::Text(text)) => {
                    log::warn!("Transport: skipping text message ({} bytes)", text.len());
                    None
                }
                Ok(_) => None,
                Err(e) => Some(Err(e.into())),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;

    #[tokio::test]
    async fn test_binary_frames_until_close() {
        let messages = futures::stream::iter(vec![
            Ok(Message::binary(vec![9, b'a'])),
            Ok(Message::text(String::from("hello"))),
            Ok(Message::Ping(Bytes::new())),
            Ok(Message::binary(vec![1, 2])),
            Ok(Message::Close(None)),
            Ok(Message::binary(vec![3])),
        ]);

        let frames: Vec<_> = binary_frames(messages).collect().await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_ref().unwrap(), &Bytes::from_static(&[9, b'a']));
        assert_eq!(frames[1].as_ref().unwrap(), &Bytes::from_static(&[1, 2]));
    }

    #[tokio::test]
    async fn test_binary_frames_forwards_errors() {
        let messages = futures::stream::iter(vec![
            Ok(Message::binary(vec![1])),
            Err(tungstenite::Error::ConnectionClosed),
        ]);

        let frames: Vec<_> = binary_frames(messages).collect().await;
        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[1], Err(FeedError::Transport(_))));
    }
}

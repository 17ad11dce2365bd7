//! Arbitrum precompiles and the `NodeInterface`.
//!
//! See [`crate::addresses`] for where each interface lives.

#![allow(missing_docs)]

use alloy_sol_types::sol;

sol! {
    /// System level functionality, used to send messages to the parent chain.
    #[derive(Debug)]
    interface IArbSys {
        /// Classic withdrawal event.
        event L2ToL1Transaction(
            address caller,
            address indexed destination,
            uint256 indexed uniqueId,
            uint256 indexed batchNumber,
            uint256 indexInBatch,
            uint256 arbBlockNum,
            uint256 ethBlockNum,
            uint256 timestamp,
            uint256 callvalue,
            bytes data
        );

        /// Nitro withdrawal event.
        event L2ToL1Tx(
            address caller,
            address indexed destination,
            uint256 indexed hash,
            uint256 indexed position,
            uint256 arbBlockNum,
            uint256 ethBlockNum,
            uint256 timestamp,
            uint256 callvalue,
            bytes data
        );

        event SendMerkleUpdate(uint256 indexed reserved, bytes32 indexed hash, uint256 indexed position);

        function arbOSVersion() external view returns (uint256);
        function arbBlockNumber() external view returns (uint256);
        function withdrawEth(address destination) external payable returns (uint256);
        function sendTxToL1(address destination, bytes calldata data) external payable returns (uint256);
        function sendMerkleTreeState()
            external
            view
            returns (uint256 size, bytes32 root, bytes32[] memory partials);
    }

    /// Management of retryable tickets.
    #[derive(Debug)]
    interface IArbRetryableTx {
        event TicketCreated(bytes32 indexed ticketId);
        event LifetimeExtended(bytes32 indexed ticketId, uint256 newTimeout);
        event RedeemScheduled(
            bytes32 indexed ticketId,
            bytes32 indexed retryTxHash,
            uint64 indexed sequenceNum,
            uint64 donatedGas,
            address gasDonor,
            uint256 maxRefund,
            uint256 submissionFeeRefund
        );
        event Canceled(bytes32 indexed ticketId);

        /// Raised when the ticket does not exist, or no longer exists.
        error NoTicketWithID();

        function getLifetime() external view returns (uint256);
        function getTimeout(bytes32 ticketId) external view returns (uint256);
        function getBeneficiary(bytes32 ticketId) external view returns (address);
        function redeem(bytes32 ticketId) external returns (bytes32);
        function keepalive(bytes32 ticketId) external returns (uint256);
        function cancel(bytes32 ticketId) external;
    }

    /// Virtual contract answering node level queries.
    #[derive(Debug)]
    interface INodeInterface {
        function constructOutboxProof(uint64 size, uint64 leaf)
            external
            view
            returns (bytes32 send, bytes32 root, bytes32[] memory proof);

        function findBatchContainingBlock(uint64 blockNum) external view returns (uint64 batch);

        function getL1Confirmations(bytes32 blockHash) external view returns (uint64 confirmations);

        function legacyLookupMessageBatchProof(uint256 batchNum, uint64 index)
            external
            view
            returns (
                bytes32[] memory proof,
                uint256 path,
                address l2Sender,
                address l1Dest,
                uint256 l2Block,
                uint256 l1Block,
                uint256 timestamp,
                uint256 amount,
                bytes memory calldataForL1
            );

        function estimateRetryableTicket(
            address sender,
            uint256 deposit,
            address to,
            uint256 l2CallValue,
            address excessFeeRefundAddress,
            address callValueRefundAddress,
            bytes calldata data
        ) external;

        function l2BlockRangeForL1(uint64 blockNum)
            external
            view
            returns (uint64 firstBlock, uint64 lastBlock);

        function nitroGenesisBlock() external pure returns (uint256 number);
    }
}

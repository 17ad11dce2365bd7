//! Bridge contracts deployed on the parent chain.

#![allow(missing_docs)]

use alloy_sol_types::sol;

sol! {
    /// The delayed inbox.
    #[derive(Debug)]
    interface IInbox {
        event InboxMessageDelivered(uint256 indexed messageNum, bytes data);
        event InboxMessageDeliveredFromOrigin(uint256 indexed messageNum);

        function createRetryableTicket(
            address to,
            uint256 l2CallValue,
            uint256 maxSubmissionCost,
            address excessFeeRefundAddress,
            address callValueRefundAddress,
            uint256 gasLimit,
            uint256 maxFeePerGas,
            bytes calldata data
        ) external payable returns (uint256);

        function depositEth() external payable returns (uint256);

        function calculateRetryableSubmissionFee(uint256 dataLength, uint256 baseFee)
            external
            view
            returns (uint256);
    }

    /// The bridge, recording every message delivered to the rollup.
    #[derive(Debug)]
    interface IBridge {
        event MessageDelivered(
            uint256 indexed messageIndex,
            bytes32 indexed beforeInboxAcc,
            address inbox,
            uint8 kind,
            address sender,
            bytes32 messageDataHash,
            uint256 baseFeeL1,
            uint64 timestamp
        );

        function activeOutbox() external view returns (address);
    }

    /// The nitro outbox.
    #[derive(Debug)]
    interface IOutbox {
        function executeTransaction(
            bytes32[] calldata proof,
            uint256 index,
            address l2Sender,
            address to,
            uint256 l2Block,
            uint256 l1Block,
            uint256 l2Timestamp,
            uint256 value,
            bytes calldata data
        ) external;

        function isSpent(uint256 index) external view returns (bool);
    }

    /// The classic outbox. One instance serves a contiguous range of batches.
    #[derive(Debug)]
    interface IClassicOutbox {
        function executeTransaction(
            uint256 batchNum,
            bytes32[] calldata proof,
            uint256 index,
            address l2Sender,
            address destAddr,
            uint256 l2Block,
            uint256 l1Block,
            uint256 l2Timestamp,
            uint256 amount,
            bytes calldata calldataForL1
        ) external;

        function outboxEntryExists(uint256 batchNum) external view returns (bool);
    }

    #[derive(Debug, PartialEq, Eq)]
    enum MachineStatus {
        RUNNING,
        FINISHED,
        ERRORED,
        TOO_FAR
    }

    /// Global state of the rollup at an assertion boundary.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct GlobalState {
        bytes32[2] bytes32Vals;
        uint64[2] u64Vals;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct ExecutionState {
        GlobalState globalState;
        MachineStatus machineStatus;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Assertion {
        ExecutionState beforeState;
        ExecutionState afterState;
        uint64 numBlocks;
    }

    /// A rollup node as stored by the rollup contract.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct Node {
        bytes32 stateHash;
        bytes32 challengeHash;
        bytes32 confirmData;
        uint64 prevNum;
        uint64 deadlineBlock;
        uint64 noChildConfirmedBeforeBlock;
        uint64 stakerCount;
        uint64 childStakerCount;
        uint64 firstChildBlock;
        uint64 latestChildNumber;
        uint64 createdAtBlock;
        bytes32 nodeHash;
    }

    /// Read access to the rollup's node tree.
    #[derive(Debug)]
    interface IRollupCore {
        event NodeCreated(
            uint64 indexed nodeNum,
            bytes32 indexed parentNodeHash,
            bytes32 indexed nodeHash,
            bytes32 executionHash,
            Assertion assertion,
            bytes32 afterInboxBatchAcc,
            bytes32 wasmModuleRoot,
            uint256 inboxMaxCount
        );

        function latestConfirmed() external view returns (uint64);
        function latestNodeCreated() external view returns (uint64);
        function getNode(uint64 nodeNum) external view returns (Node memory);
        function confirmPeriodBlocks() external view returns (uint64);
    }
}

impl GlobalState {
    /// The L2 block hash the state was asserted at.
    pub const fn block_hash(&self) -> alloy_primitives::B256 {
        self.bytes32Vals[0]
    }

    /// The send root at the asserted block.
    pub const fn send_root(&self) -> alloy_primitives::B256 {
        self.bytes32Vals[1]
    }
}
